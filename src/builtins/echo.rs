use std::io::Write;

use super::Builtin;

pub struct Echo;

impl Builtin for Echo {
    fn run(&self, args: &[String], out: &mut dyn Write) -> i32 {
        match writeln!(out, "{}", args.join(" ")) {
            Ok(()) => 0,
            Err(e) => {
                log::warn!("echo: {e}");
                1
            }
        }
    }
}
