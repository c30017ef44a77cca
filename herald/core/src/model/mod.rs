// API input/output types shared between the server and its callers.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Error;

/// Organization membership roles a dispatch may be narrowed to.
///
/// An absent role means "every member"; any string outside this set is a
/// caller error and is rejected before recipient resolution starts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum OrgRole {
    OrgManager,
    OrgAuditor,
    BillingManager,
}

impl FromStr for OrgRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OrgManager" => Ok(Self::OrgManager),
            "OrgAuditor" => Ok(Self::OrgAuditor),
            "BillingManager" => Ok(Self::BillingManager),
            _ => Err(Error::InvalidOrgRole { role: s.to_string() }),
        }
    }
}

impl Display for OrgRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrgManager => write!(f, "OrgManager"),
            Self::OrgAuditor => write!(f, "OrgAuditor"),
            Self::BillingManager => write!(f, "BillingManager"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::OrgRole;

    #[test]
    fn parses_known_roles() {
        assert_eq!(OrgRole::from_str("OrgManager").unwrap(), OrgRole::OrgManager);
        assert_eq!(OrgRole::from_str("OrgAuditor").unwrap(), OrgRole::OrgAuditor);
        assert_eq!(OrgRole::from_str("BillingManager").unwrap(), OrgRole::BillingManager);
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(OrgRole::from_str("OrgUser").is_err());
        assert!(OrgRole::from_str("").is_err());
    }
}
