mod contact;
mod extract;
mod grant_type;
mod phrases;
mod quality;

pub use contact::{extract_contact_info, ContactInfo};
pub use extract::{
    best_match, extract_deadline, extract_description, extract_eligibility, extract_funding,
    extract_title, extract_url, FieldMatch,
};
pub use grant_type::{detect_grant_type, GrantTypeTag};
pub use phrases::key_phrases;
pub use quality::text_quality;
