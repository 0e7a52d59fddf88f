use crate::action::Action;

pub struct CommandParser;

impl CommandParser {
    pub fn parse(input: &str) -> Result<Action, String> {
        let input = input.trim();
        if !input.starts_with('/') {
            return Err("Not a command".to_string());
        }

        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        let args = args.trim();

        match cmd {
            "/help" => Ok(Action::Help),
            "/clear" => Ok(Action::Clear),
            "/name" => {
                if args.is_empty() {
                    Ok(Action::ShowProjectName)
                } else {
                    Ok(Action::SetProjectName { name: args.to_string() })
                }
            }
            "/quit" => Ok(Action::Quit),
            _ => Err(format!("Unknown command: {}. Type /help for available commands.", cmd)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(CommandParser::parse("/help"), Ok(Action::Help));
        assert_eq!(CommandParser::parse("  /clear  "), Ok(Action::Clear));
        assert_eq!(CommandParser::parse("/quit"), Ok(Action::Quit));
    }

    #[test]
    fn test_parse_name_with_and_without_args() {
        assert_eq!(CommandParser::parse("/name"), Ok(Action::ShowProjectName));
        assert_eq!(
            CommandParser::parse("/name  shop backend "),
            Ok(Action::SetProjectName { name: "shop backend".to_string() })
        );
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert!(CommandParser::parse("todo app").is_err());
        let err = CommandParser::parse("/deploy now").unwrap_err();
        assert!(err.contains("/deploy"));
    }
}
