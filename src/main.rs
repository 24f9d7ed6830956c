//! rpresence main entrypoint.

use rpresence::run;

fn main() {
    println!();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(run());

    // A pending stdin read must not keep the process alive.
    runtime.shutdown_background();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
