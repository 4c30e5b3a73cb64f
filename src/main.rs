#![allow(non_snake_case)]
use RustedQuadrics::Utils::logger::init_logger;
use RustedQuadrics::Utils::settings_parser::CalcSettings;
use RustedQuadrics::calculator::menu::Menu;
use RustedQuadrics::errors::CalcResult;

fn main() -> CalcResult<()> {
    let settings = CalcSettings::load_default()?;
    init_logger(&settings.logging)?;
    let mut menu = Menu::with_terminal(settings)?;
    menu.run()?;
    println!("Bye!");
    Ok(())
}
