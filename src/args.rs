//! Option-to-argument translation seam.
//!
//! Turning structured tidy options into flags is owned by the target's own
//! option definitions, not by this crate. The driver only needs something
//! that yields an ordered list of argument strings.

/// Converts an options value into ordered command-line arguments.
pub trait ToCliArgs {
    fn to_cli_args(&self) -> Vec<String>;
}

/// No options: contributes no arguments.
impl ToCliArgs for () {
    fn to_cli_args(&self) -> Vec<String> {
        Vec::new()
    }
}

impl ToCliArgs for [String] {
    fn to_cli_args(&self) -> Vec<String> {
        self.to_vec()
    }
}

impl ToCliArgs for [&str] {
    fn to_cli_args(&self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl ToCliArgs for Vec<String> {
    fn to_cli_args(&self) -> Vec<String> {
        self.clone()
    }
}

impl<const N: usize> ToCliArgs for [&str; N] {
    fn to_cli_args(&self) -> Vec<String> {
        self.as_slice().to_cli_args()
    }
}

impl<T: ToCliArgs + ?Sized> ToCliArgs for &T {
    fn to_cli_args(&self) -> Vec<String> {
        (**self).to_cli_args()
    }
}
