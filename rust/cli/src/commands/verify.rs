use std::io::Write;
use std::path::Path;

use doudizhu_engine::ledger::Ledger;

use crate::error::CliError;

/// Run a full verified read of a ledger file and report the outcome.
/// Corruption diagnostics name the offending sequence number.
pub fn handle_verify_command(
    input: &Path,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    match Ledger::read_path(input) {
        Ok(records) => {
            writeln!(
                out,
                "OK: {} events, hash chain verified ({})",
                records.len(),
                input.display()
            )?;
            Ok(())
        }
        Err(e) => {
            writeln!(err, "verification failed: {}", e)?;
            Err(e.into())
        }
    }
}
