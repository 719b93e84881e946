fn main() {
    if let Err(err) = todokit::cli::run() {
        todokit::ui::eprintln_error(&err);
        std::process::exit(todokit::exit::exit_code(&err));
    }
}
