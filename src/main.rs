use anyhow::Result;

fn main() -> Result<()> {
    matrix_chart::run()
}
