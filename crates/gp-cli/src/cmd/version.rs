use gp_core::CommandError;

pub fn run() -> Result<(), CommandError> {
    println!("{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
