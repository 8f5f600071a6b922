mod acceptance;
mod canonical;
mod ccfddl;
mod common;

pub use acceptance::CcfddlAcceptanceAdapter;
pub use canonical::CanonicalAdapter;
pub use ccfddl::CcfddlConferenceAdapter;
pub use common::{decode_payload, PayloadEncoding};

pub(crate) use common::{clean_optional, collect_rankings, de_count, de_year, describe_kind, entry_label};
