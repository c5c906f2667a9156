use std::fmt::{Display, Formatter};
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use predicates::Predicate;
use predicates::reflection::{Case, Parameter, PredicateReflection, Product};

const PERMISSION_BITS: u32 = 0o777;

/// Matches files whose permission bits are exactly `mode`.
#[derive(Clone, Copy, Debug)]
pub struct PermissionsPredicate {
    mode: u32,
}

pub fn permissions(mode: u32) -> PermissionsPredicate {
    PermissionsPredicate {
        mode: mode & PERMISSION_BITS,
    }
}

/// Readable and writable by the owner only.
pub fn owner_only() -> PermissionsPredicate {
    permissions(0o600)
}

impl PermissionsPredicate {
    fn actual_mode(&self, path: &Path) -> Result<u32, std::io::Error> {
        Ok(path.metadata()?.mode() & PERMISSION_BITS)
    }
}

impl Predicate<Path> for PermissionsPredicate {
    fn eval(&self, variable: &Path) -> bool {
        self.actual_mode(variable).is_ok_and(|mode| mode == self.mode)
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &Path) -> Option<Case<'a>> {
        let actual = self.actual_mode(variable);
        let matched = actual.as_ref().is_ok_and(|mode| *mode == self.mode);
        if matched != expected {
            return None
        }
        let product = match actual {
            Ok(mode) => Product::new("mode", format!("{mode:#05o}")),
            Err(e) => Product::new("error", e),
        };
        Some(Case::new(Some(self), matched).add_product(product))
    }
}

impl PredicateReflection for PermissionsPredicate {
    fn parameters<'a>(&'a self) -> Box<dyn Iterator<Item=Parameter<'a>> + 'a> {
        Box::new(std::iter::once(Parameter::new("mode", &self.mode)))
    }
}

impl Display for PermissionsPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "permissions == {:#05o}", self.mode)
    }
}
