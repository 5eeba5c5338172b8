// Coarse classification of Discord API failures, for the handful of places
// where the user-facing reply depends on what went wrong.

use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFailure {
    NotFound,
    Forbidden,
    Other,
}

pub fn classify(err: &serenity::Error) -> ApiFailure {
    match err {
        serenity::Error::Http(http) => classify_status(http.status_code().map(|s| s.as_u16())),
        _ => ApiFailure::Other,
    }
}

fn classify_status(status: Option<u16>) -> ApiFailure {
    match status {
        Some(404) => ApiFailure::NotFound,
        Some(401 | 403) => ApiFailure::Forbidden,
        _ => ApiFailure::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(classify_status(Some(404)), ApiFailure::NotFound);
        assert_eq!(classify_status(Some(403)), ApiFailure::Forbidden);
        assert_eq!(classify_status(Some(500)), ApiFailure::Other);
        assert_eq!(classify_status(None), ApiFailure::Other);
    }

    #[test]
    fn test_non_http_errors_are_other() {
        let err = serenity::Error::Other("gateway hiccup");
        assert_eq!(classify(&err), ApiFailure::Other);
    }
}
