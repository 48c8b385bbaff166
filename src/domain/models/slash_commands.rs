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
        let prefix = args[0].to_string();
        args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_new_chat()
            || cmd.is_load()
            || cmd.is_queue_list()
            || cmd.is_unqueue()
            || cmd.is_toggle_open()
            || cmd.is_toggle_fullscreen()
            || cmd.is_size()
            || cmd.is_status()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn is_new_chat(&self) -> bool {
        return ["/n", "/new"].contains(&self.command.as_str());
    }

    pub fn is_load(&self) -> bool {
        return ["/l", "/load"].contains(&self.command.as_str()) && !self.args.is_empty();
    }

    pub fn is_queue_list(&self) -> bool {
        return ["/queue"].contains(&self.command.as_str());
    }

    pub fn is_unqueue(&self) -> bool {
        return ["/unqueue"].contains(&self.command.as_str()) && !self.args.is_empty();
    }

    pub fn is_toggle_open(&self) -> bool {
        return ["/t", "/toggle"].contains(&self.command.as_str());
    }

    pub fn is_toggle_fullscreen(&self) -> bool {
        return ["/f", "/fullscreen"].contains(&self.command.as_str());
    }

    pub fn is_size(&self) -> bool {
        return ["/size"].contains(&self.command.as_str())
            && self.args.len() == 2
            && self.args.iter().all(|e| return e.parse::<u32>().is_ok());
    }

    pub fn is_status(&self) -> bool {
        return ["/s", "/status"].contains(&self.command.as_str());
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        if !self.is_size() {
            return None;
        }

        let width = self.args[0].parse::<u32>().ok()?;
        let height = self.args[1].parse::<u32>().ok()?;
        return Some((width, height));
    }
}
