#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Load(Option<&'a str>),
    Reset,
    Help,
    Quit,
    Input(&'a str),
}

impl<'a> ChatCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return Self::Input(trimmed);
        };

        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, Some(argument.trim()).filter(|arg| !arg.is_empty())),
            None => (command, None),
        };

        match name.to_ascii_lowercase().as_str() {
            "load" => Self::Load(argument),
            "reset" => Self::Reset,
            "help" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Input(trimmed),
        }
    }
}

pub const CHAT_HELP: &str = "Comandos: :load [carpeta] carga los PDF, :reset los descarta, :help, :quit. Cualquier otro texto es una consulta.";
