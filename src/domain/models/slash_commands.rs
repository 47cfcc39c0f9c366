#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_select()
            || cmd.is_dismiss()
            || cmd.is_ask()
            || cmd.is_reset()
            || cmd.is_session()
        {
            return Some(cmd);
        }

        return None;
    }

    /// Everything after the command, joined back together.
    pub fn rest(&self) -> String {
        return self.args.join(" ");
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn is_select(&self) -> bool {
        return ["/s", "/select"].contains(&self.command.as_str());
    }

    pub fn is_dismiss(&self) -> bool {
        return ["/d", "/dismiss"].contains(&self.command.as_str());
    }

    pub fn is_ask(&self) -> bool {
        return ["/a", "/ask"].contains(&self.command.as_str());
    }

    pub fn is_reset(&self) -> bool {
        return ["/r", "/reset"].contains(&self.command.as_str());
    }

    pub fn is_session(&self) -> bool {
        return ["/session"].contains(&self.command.as_str());
    }
}
