pub const APP_NAME: &str = "usepkg";

/// Variable holding the ordered list of active `branch,name,path` triples.
pub const BRANCHES_VAR: &str = "USE_BRANCHES";

/// Prefix shared by every per-branch ledger variable (`USE_<BRANCH>_<FIELD>`).
pub const LEDGER_VAR_PREFIX: &str = "USE_";

/// Registry of resolvable packages, `name@path` pairs joined by `:`.
pub const PACKAGES_VAR: &str = "USE_PKG_PACKAGES";

pub const AUTO_VERSION_OFFSET_VAR: &str = "USE_PKG_AUTO_VERSION_OFFSET";

/// How many parent directories above a package file hold its version.
pub const DEFAULT_AUTO_VERSION_OFFSET: usize = 2;

pub const PATH_LIST_SEPARATOR: char = ':';

pub const PACKAGE_EXTENSION: &str = "use";
