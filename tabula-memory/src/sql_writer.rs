use tabula_core::SqlWriter;

/// Renders the statements the memory database interprets, for its debug log.
#[derive(Default)]
pub struct MemorySqlWriter {}

impl SqlWriter for MemorySqlWriter {
    fn write_truncate(&self, out: &mut String, name: &str) {
        out.push_str("DELETE FROM ");
        self.write_identifier_quoted(out, name);
        out.push(';');
    }
}
