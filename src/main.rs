use anyhow::Result;

fn main() -> Result<()> {
    konvoi::telemetry::init();
    konvoi::cli::run()
}
