use std::io::Write;

use super::Builtin;

/// A builtin that ignores its arguments and returns a fixed status.
pub struct FixedStatus {
    status: i32,
}

impl FixedStatus {
    pub fn new(status: i32) -> Self {
        Self { status }
    }
}

impl Builtin for FixedStatus {
    fn run(&self, _args: &[String], _out: &mut dyn Write) -> i32 {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fixed_status() {
        let mut out = Vec::new();
        assert_eq!(FixedStatus::new(0).run(&[], &mut out), 0);
        assert_eq!(FixedStatus::new(1).run(&["x".into()], &mut out), 1);
        assert!(out.is_empty());
    }
}
