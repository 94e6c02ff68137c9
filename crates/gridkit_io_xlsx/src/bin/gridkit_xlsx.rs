use anyhow::Result;

fn main() -> Result<()> {
    gridkit_io_xlsx::cli::run()
}
