use sedicipu2::{cli::command, Variant};

fn main() {
    command::terminal_init();
    command::logger_init();
    command::mkdrom(
        Variant::Mini,
        command::SubcommandMkdrom::from_args_named("mkdrom-mini", std::env::args_os()),
    );
}
