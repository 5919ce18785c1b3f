use hvac_sizing::input::Input;
use schemars::schema_for;

fn main() -> anyhow::Result<()> {
    let schema = schema_for!(Input);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
