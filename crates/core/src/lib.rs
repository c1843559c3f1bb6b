pub mod archive;
pub mod auth;
pub mod config;
pub mod job;

pub use archive::{
    list_archives, resolve_archive, sanitize_archive_name, ArchiveEntry, ArchiveError,
};
pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, FetcherConfig, SanitizedConfig, ServerConfig,
};
pub use job::{
    clamp_file_count, normalize_file_count, FetchRequest, JobDispatcher, JobError, JobId,
    JobRecord, JobRegistry, JobStatus, StatusCounts, ARCHIVE_MARKER,
};
