use crate::core::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const AUDIT_HEADER: &str = "timestamp,action,user,details\n";

/// Append-only CSV record of mutating commands.
pub struct AuditLog;

impl AuditLog {
    pub fn create(path: &Path) -> Result<()> {
        std::fs::write(path, AUDIT_HEADER)?;
        Ok(())
    }

    pub fn append(path: &Path, action: &str, details: &str) -> Result<()> {
        if !path.exists() {
            Self::create(path)?;
        }

        let timestamp = chrono::Utc::now().to_rfc3339();
        let user = whoami::username();
        let entry = format!(
            "{},{},{},{}\n",
            timestamp,
            action,
            sanitize(&user),
            sanitize(details)
        );

        OpenOptions::new()
            .append(true)
            .open(path)?
            .write_all(entry.as_bytes())?;
        Ok(())
    }
}

fn sanitize(field: &str) -> String {
    field.replace([',', '\n', '\r'], " ")
}
