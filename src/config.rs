use std::time::Duration;

/// Connection settings for the backing object store.
///
/// Credentials are taken from the environment by the S3 driver
/// (`AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`), so they never live in
/// this struct.
#[derive(Clone, Debug)]
pub struct Config {
    /// Endpoint of the S3-compatible server, e.g. a local MinIO instance.
    pub endpoint_url: String,
    pub region: String,
    /// Single shared bucket; per-user isolation happens purely through the
    /// `user-{id}/` key prefix convention.
    pub bucket: String,
    /// Per-call timeout applied by the SDK layer.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:9000".to_string(),
            region: "us-east-1".to_string(),
            bucket: "user-files".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
