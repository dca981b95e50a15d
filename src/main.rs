use sedicipu2::cli::command;
use structopt::StructOpt;

fn main() {
    command::terminal_init();
    command::logger_init();
    command::root(command::CommandRoot::from_iter(command::normalize_args(
        std::env::args_os(),
        command::ROOT_FLAG_POS,
    )));
}
