use spacebridge::ui::output;

fn main() {
    if let Err(e) = spacebridge::cli::run() {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
