//! Error codes reported with command usage events

/// Default for failures without a specific code
pub const SYSTEM_ERROR: &str = "system_error";
/// Default for user-fixable failures without a specific code
pub const USER_ERROR: &str = "user_error";

pub const SUPERVISOR_UNAVAILABLE: &str = "supervisor_unavailable";

// Env
pub const ENV_INVALID_ASSIGNMENT: &str = "env_invalid_assignment";

// Snapshot
pub const SNAPSHOT_FAILED: &str = "snapshot_failed";

// Timeout
pub const TIMEOUT_INVALID_DURATION: &str = "timeout_invalid_duration";
pub const TIMEOUT_PLAN_UPGRADE_REQUIRED: &str = "timeout_plan_upgrade_required";

// Send analytics
pub const SEND_ANALYTICS_INVALID_PAYLOAD: &str = "send_analytics_invalid_payload";
