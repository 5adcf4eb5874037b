pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MONGO_MIN_POOL_SIZE: u32 = 5;
pub const MONGO_MAX_POOL_SIZE: u32 = 10;
pub const MONGO_CONN_TIMEOUT: u64 = 10;

pub const NOTIFICATION_JOB_INTERVAL: u64 = 60;
// a run must finish well before the next scheduled one is due
pub const NOTIFICATION_RUN_TIMEOUT: u64 = 9 * 60;
pub const NOTIFY_BATCH_SIZE: usize = 50;

pub const ONE_HOUR_SECS: u64 = 3600;
pub const ONE_DAY_SECS: u64 = 24 * 3600;

pub const DB_NAME: &str = "trpg";

pub const COLL_SESSIONS: &str = "sessions";
pub const COLL_USERS: &str = "users";

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const FIREBASE_MESSAGE_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
pub const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/v1/projects/{{projectId}}/messages:send";
pub const ACCESS_TOKEN_REFRESH_MARGIN: u64 = 15 * 60;

pub const PUSH_MESSAGE_TITLE: &str = "TRPG 세션 알림";
pub const ONE_HOUR_MESSAGE: &str = "\"{{title}}\" 세션이 1시간 후에 시작됩니다!";
pub const ONE_DAY_MESSAGE: &str = "\"{{title}}\" 세션이 내일 시작됩니다!";
