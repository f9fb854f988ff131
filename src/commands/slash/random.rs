//! Random slash command: /random

use serenity::builder::CreateApplicationCommand;

/// Creates random commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_random_command()]
}

fn create_random_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("random")
        .description("Roll a random digit from 0 to 9")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_random_command() {
        let commands = create_commands();
        assert_eq!(commands.len(), 1);

        let random = &commands[0];
        let name = random.0.get("name").unwrap().as_str().unwrap();
        assert_eq!(name, "random");
    }
}
