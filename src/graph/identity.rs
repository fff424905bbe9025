//
//  identity.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use std::path::Path;

use super::types::FunctionIdentity;
use crate::service::Occurrence;

/// Canonical separator for identity paths.
pub const PATH_SEPARATOR: char = '/';

/// Render a path with `/` as the only separator, so `src\a.cpp` and
/// `src/a.cpp` compare equal.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| if c == '\\' { PATH_SEPARATOR } else { c })
        .collect()
}

/// Identity of an occurrence. Names play no part: two occurrences at the
/// same place are the same node even when reported with different names.
pub fn identity_of(occurrence: &Occurrence) -> FunctionIdentity {
    let location = &occurrence.location;
    FunctionIdentity::new(&location.file, location.line, location.column)
}
