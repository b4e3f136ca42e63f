use thiserror::Error;

/// Errors produced while reading configuration documents.
///
/// Store resolution never returns these to callers: each store degrades to
/// its fallback and logs the error instead. They surface directly only from
/// [`MapperConfig::load`](crate::MapperConfig::load).
#[derive(Debug, Error)]
pub enum VoicemapError {
    #[error("resource unavailable: {name}: {source}")]
    ResourceUnavailable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document {name}: {reason}")]
    MalformedDocument { name: String, reason: String },

    #[error("incomplete data in {name}: missing {field}")]
    IncompleteData { name: String, field: String },

    #[error("config error: {0}")]
    Config(String),
}

impl VoicemapError {
    pub(crate) fn malformed(name: &str, reason: impl ToString) -> Self {
        Self::MalformedDocument {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn incomplete(name: &str, field: &str) -> Self {
        Self::IncompleteData {
            name: name.to_string(),
            field: field.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = VoicemapError::ResourceUnavailable {
            name: "voice.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "resource unavailable: voice.json: no such file"
        );

        let err = VoicemapError::malformed("voice_map.json", "expected object");
        assert_eq!(
            err.to_string(),
            "malformed document voice_map.json: expected object"
        );

        let err = VoicemapError::incomplete("voice_map.json", "svg.viewBox");
        assert_eq!(
            err.to_string(),
            "incomplete data in voice_map.json: missing svg.viewBox"
        );
    }
}
