//! Lease command formatting

use std::fmt;

use crate::domain::manifest::DatabaseParams;

/// Program invoked by the generated command.
pub const LEASE_PROGRAM: &str = "bart";

/// A ready-to-run `bart database lease request` invocation.
///
/// Values are interpolated verbatim: whitespace or shell metacharacters in
/// a resolved value end up unquoted in the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseCommand {
    params: DatabaseParams,
}

impl LeaseCommand {
    pub fn new(params: DatabaseParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DatabaseParams {
        &self.params
    }
}

impl From<DatabaseParams> for LeaseCommand {
    fn from(params: DatabaseParams) -> Self {
        Self::new(params)
    }
}

impl fmt::Display for LeaseCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{LEASE_PROGRAM} database lease request -i {} -d {} -s {}",
            self.params.host, self.params.name, self.params.schema
        )
    }
}
