//! Adding mutators after secret resolution

use secretconf::{
    anyhow, Bootstrap, EnvConfig, FieldSpec, Finalize, MapLookuper, MutateError, Value,
};

#[derive(Debug, Default, EnvConfig)]
struct Config {
    #[env(default = "info")]
    pub log_level: String,

    #[env(default = "${HOME}/data")]
    pub data_dir: String,
}

impl Finalize for Config {}

/// Expands `${HOME}` in plain values.
fn expand_home(_: &FieldSpec, value: Value) -> Result<Value, MutateError> {
    match value {
        Value::Plain(s) if s.contains("${HOME}") => {
            let home = std::env::var("HOME").map_err(|e| anyhow::anyhow!("HOME: {e}"))?;
            Ok(Value::Plain(s.replace("${HOME}", &home)))
        }
        other => Ok(other),
    }
}

fn main() -> anyhow::Result<()> {
    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "IN_MEMORY")
        .with("LOG_LEVEL", "DEBUG");

    let config: Config = Bootstrap::new(&env)
        .mutator(expand_home)
        .mutator(|spec: &FieldSpec, value: Value| -> Result<Value, MutateError> {
            match value {
                Value::Plain(s) if spec.key == "LOG_LEVEL" => Ok(Value::Plain(s.to_lowercase())),
                other => Ok(other),
            }
        })
        .load()?;

    println!("{config:#?}");
    Ok(())
}
