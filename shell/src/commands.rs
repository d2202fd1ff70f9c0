use crate::palette::{MAUVE, RESET, TEAL};
use sqlscalar::Config;
use std::io::Write;

pub fn handle_command(command: &str, config: &Config) -> bool {
    let parts = command.split_whitespace().collect::<Vec<_>>();

    match parts.as_slice() {
        ["/q"] | ["/quit"] => return true,
        ["/h"] | ["/help"] | ["/?"] => {
            println!("Available commands:");
            println!("  {TEAL}/q, /quit{RESET}      Exit the shell");
            println!("  {TEAL}/h, /help{RESET}      Show this help message");
            println!("  {TEAL}/clear, /c{RESET}     Clear the terminal screen");
            println!("  {TEAL}/config{RESET}        Show the active configuration");
            println!();
            println!("Expressions:");
            println!("  {MAUVE}1.50 * 3{RESET}                       + - * / % || = <> < <= > >=");
            println!("  {MAUVE}like 'abc' 'a%' escape '!'{RESET}     LIKE, ilike ignores case");
            println!("  {MAUVE}range 'abc%'{RESET}                   index range of a LIKE pattern");
            println!("  {MAUVE}cast '12.5' as decimal(4,1){RESET}    conversions");
            println!("  {MAUVE}date '15.01.2024'{RESET}              date and time literals");
            println!("  {MAUVE}substr 'abcdef' 2 3{RESET}            SUBSTR");
            println!("  {MAUVE}sqrt 2{RESET}, {MAUVE}abs -3{RESET}, {MAUVE}negate 4{RESET}        unary functions");
            println!("  {MAUVE}compare 1 1.0{RESET}                  ordering of two values");
            println!("  {MAUVE}encode 12.5 as double{RESET}          stored bytes of a value");
            println!("  {MAUVE}decode 0e020207e8{RESET}              value of stored bytes");
        }
        ["/clear"] | ["/c"] => {
            print!("\x1b[2J\x1b[1;1H");
            std::io::stdout().flush().ok();
        }
        ["/config"] => {
            println!("format version   {:?}", config.format_version);
            println!("float limits     {:?}", config.float_limits());
            println!("max precision    {}", config.decimal.max_precision);
            println!("divide scale     {}", config.decimal.min_divide_scale);
            println!("date patterns    {:?}", config.locale.date_patterns);
            println!("time patterns    {:?}", config.locale.time_patterns);
        }
        _ => println!("Unknown command: {command}"),
    }
    false
}
