//! Draft delivery. The only supported mode writes local files for manual
//! review and sending — nothing is ever sent automatically.

use std::path::Path;

use tracing::info;

use schoolscout_shared::{Lead, Result, ScoutError};

/// Sink for generated draft content.
pub trait Delivery {
    /// Deliver `content` for `lead` to `output_path`.
    fn deliver(&self, lead: &Lead, content: &str, output_path: &Path) -> Result<()>;
}

/// Writes drafts to local markdown files.
pub struct ManualDelivery;

impl Delivery for ManualDelivery {
    fn deliver(&self, lead: &Lead, content: &str, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ScoutError::io(parent, e))?;
        }
        let body = format!("{}\n", content.trim());
        std::fs::write(output_path, body).map_err(|e| ScoutError::io(output_path, e))?;
        info!(lead_id = %lead.lead_id, path = %output_path.display(), "draft written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn writes_trimmed_content_with_trailing_newline() {
        let dir = std::env::temp_dir().join(format!("scout-delivery-{}", Uuid::now_v7()));
        let path = dir.join("drafts").join("lead_email1.md");
        let lead = Lead::new("Eastside Prep", "Downey, CA");

        ManualDelivery
            .deliver(&lead, "  Hello team.  \n\n", &path)
            .expect("deliver");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "Hello team.\n");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
