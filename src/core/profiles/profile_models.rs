// Profile domain models.
//
// Pure data, no Discord types. User ids are plain u64 snowflakes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile_service::ProfileError;

/// How many profiles the list command shows per page.
pub const PROFILES_PER_PAGE: usize = 15;

const MAX_DISPLAY_NAME_LEN: usize = 50;
const MAX_REGION_LEN: usize = 50;

/// A registered member profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: u64,
    pub username: String,
    pub display_name: String,
    pub birth_year: String,
    pub gender: String,
    pub region: String,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Moderator-only metadata attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminInfo {
    pub user_id: u64,
    pub warning_count: u32,
    pub admin_memo: String,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a profile registration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInput {
    pub username: String,
    pub display_name: String,
    pub birth_year: String,
    pub gender: String,
    pub region: String,
}

impl ProfileInput {
    /// Trim and validate raw registration fields.
    ///
    /// Birth years are accepted as either two or four digits ("08" or "2008").
    pub fn new(
        username: &str,
        display_name: &str,
        birth_year: &str,
        gender: &str,
        region: &str,
    ) -> Result<Self, ProfileError> {
        let username = username.trim();
        let display_name = display_name.trim();
        let birth_year = birth_year.trim();
        let gender = gender.trim();
        let region = region.trim();

        for (field, value) in [
            ("username", username),
            ("nickname", display_name),
            ("birth year", birth_year),
            ("gender", gender),
            ("region", region),
        ] {
            if value.is_empty() {
                return Err(ProfileError::Validation(format!("{} must not be empty", field)));
            }
        }

        if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(ProfileError::Validation(format!(
                "nickname must be at most {} characters",
                MAX_DISPLAY_NAME_LEN
            )));
        }

        if region.chars().count() > MAX_REGION_LEN {
            return Err(ProfileError::Validation(format!(
                "region must be at most {} characters",
                MAX_REGION_LEN
            )));
        }

        let digits_only = birth_year.chars().all(|c| c.is_ascii_digit());
        if !digits_only || !(birth_year.len() == 2 || birth_year.len() == 4) {
            return Err(ProfileError::Validation(
                "birth year must be 2 or 4 digits (e.g. 2008 or 08)".to_string(),
            ));
        }

        Ok(Self {
            username: username.to_string(),
            display_name: display_name.to_string(),
            birth_year: birth_year.to_string(),
            gender: gender.to_string(),
            region: region.to_string(),
        })
    }
}

/// Whether a registration created a new profile or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created,
    Updated,
}

/// One page of the profile listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePage {
    pub entries: Vec<UserProfile>,
    /// 1-based page number actually shown (clamped into range).
    pub page: usize,
    pub total_pages: usize,
    /// 1-based position of the first entry in the full listing.
    pub first_index: usize,
}

impl ProfilePage {
    /// Slice `profiles` into the requested 1-based page.
    pub fn paginate(profiles: Vec<UserProfile>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = profiles.len().div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * per_page;

        let entries = profiles.into_iter().skip(start).take(per_page).collect();

        Self {
            entries,
            page,
            total_pages,
            first_index: start + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(user_id: u64, name: &str) -> UserProfile {
        UserProfile {
            user_id,
            username: format!("user{}", user_id),
            display_name: name.to_string(),
            birth_year: "2000".to_string(),
            gender: "Other".to_string(),
            region: "Seoul".to_string(),
            registered_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn input_is_trimmed() {
        let input = ProfileInput::new(" neo#1 ", "  Neo ", " 1999", "Male ", " Busan ").unwrap();
        assert_eq!(input.display_name, "Neo");
        assert_eq!(input.birth_year, "1999");
        assert_eq!(input.region, "Busan");
    }

    #[test]
    fn rejects_bad_birth_year() {
        assert!(ProfileInput::new("u", "n", "199", "g", "r").is_err());
        assert!(ProfileInput::new("u", "n", "19a9", "g", "r").is_err());
        assert!(ProfileInput::new("u", "n", "08", "g", "r").is_ok());
    }

    #[test]
    fn rejects_empty_fields() {
        let err = ProfileInput::new("u", "   ", "2000", "g", "r").unwrap_err();
        assert!(matches!(err, ProfileError::Validation(_)));
    }

    #[test]
    fn paginates_in_pages_of_fifteen() {
        let profiles: Vec<_> = (0..32).map(|i| profile(i, &format!("p{:02}", i))).collect();

        let first = ProfilePage::paginate(profiles.clone(), 1, PROFILES_PER_PAGE);
        assert_eq!(first.entries.len(), 15);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.first_index, 1);

        let last = ProfilePage::paginate(profiles.clone(), 3, PROFILES_PER_PAGE);
        assert_eq!(last.entries.len(), 2);
        assert_eq!(last.first_index, 31);

        // Out-of-range pages clamp to the last page
        let clamped = ProfilePage::paginate(profiles, 99, PROFILES_PER_PAGE);
        assert_eq!(clamped.page, 3);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = ProfilePage::paginate(Vec::new(), 1, PROFILES_PER_PAGE);
        assert!(page.entries.is_empty());
        assert_eq!(page.total_pages, 1);
    }
}
