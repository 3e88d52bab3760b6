//! grievance CLI entry point

fn main() {
    // Initialize structured logging with env-based filter, defaulting to info
    grievance::init_tracing();

    grievance::cli::run();
}
