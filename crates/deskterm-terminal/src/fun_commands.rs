//! Easter eggs: npm, sudo, hack, matrix, cowsay, fortune, rick, coffee,
//! pizza, joke.

use std::time::{SystemTime, UNIX_EPOCH};

use deskterm_types::error::Result;

use crate::interpreter::{Command, CommandOutput, Environment};

/// Pick an entry using the clock as the seed.
fn pick<'a>(items: &[&'a str]) -> &'a str {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.subsec_nanos() as usize ^ d.as_secs() as usize);
    items[seed % items.len()]
}

/// A command that prints fixed text.
#[derive(Clone, Copy)]
struct Canned {
    name: &'static str,
    description: &'static str,
    text: &'static str,
}

impl Command for Canned {
    fn name(&self) -> &str {
        self.name
    }
    fn description(&self) -> &str {
        self.description
    }
    fn usage(&self) -> &str {
        self.name
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(self.text.to_string()))
    }
}

const CANNED: &[Canned] = &[
    Canned {
        name: "npm",
        description: "Install the internet",
        text: "npm WARN deprecated everything@1.0.0: use something else\n\
               added 1,337 packages, and audited 1,338 packages in 42s\n\
               found 99 vulnerabilities (33 low, 33 moderate, 33 critical)\n\
               run `npm audit fix --force` to make it worse",
    },
    Canned {
        name: "rick",
        description: "A classic",
        text: "Never gonna give you up\n\
               Never gonna let you down\n\
               Never gonna run around and desert you",
    },
    Canned {
        name: "coffee",
        description: "Brew a cup",
        text: "      ( (\n       ) )\n    ........\n    |      |]\n    \\      /\n     `----'\n\
               418 I'm a teapot. Coffee refused.",
    },
    Canned {
        name: "pizza",
        description: "Order a pizza",
        text: "    _....._\n  .'  o  o '.\n /  o   o  o \\\n|  o  o  o   |\n \\  o   o   /\n  '._____.'\n\
               Order placed. Estimated delivery: never (this is a terminal).",
    },
    Canned {
        name: "matrix",
        description: "Follow the white rabbit",
        text: "01001110 01100101 01101111\n\
               10 11 0 1 010 1 1 0 101 0\n\
               0 1 01 10 1 0 11 0 1 10 01\n\
               Wake up, Neo...",
    },
];

// ---------------------------------------------------------------------------
// sudo
// ---------------------------------------------------------------------------

struct SudoCmd;
impl Command for SudoCmd {
    fn name(&self) -> &str {
        "sudo"
    }
    fn description(&self) -> &str {
        "Ask nicely"
    }
    fn usage(&self) -> &str {
        "sudo <command>"
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let user = env.config().user.clone();
        let attempted = if args.is_empty() {
            String::new()
        } else {
            format!(" to run '{}'", args.join(" "))
        };
        Ok(CommandOutput::Text(format!(
            "[sudo] password for {user}: ********\n\
             {user} is not in the sudoers file. This incident will be reported{attempted}."
        )))
    }
}

// ---------------------------------------------------------------------------
// hack
// ---------------------------------------------------------------------------

struct HackCmd;
impl Command for HackCmd {
    fn name(&self) -> &str {
        "hack"
    }
    fn description(&self) -> &str {
        "Hack the mainframe"
    }
    fn usage(&self) -> &str {
        "hack [target]"
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = args.first().copied().unwrap_or("the mainframe");
        Ok(CommandOutput::Text(format!(
            "Connecting to {target}...\n\
             Bypassing firewall... [##########] 100%\n\
             Decrypting passwords... [##########] 100%\n\
             Access granted.\n\
             Just kidding. Please don't hack anything."
        )))
    }
}

// ---------------------------------------------------------------------------
// cowsay
// ---------------------------------------------------------------------------

struct CowsayCmd;
impl Command for CowsayCmd {
    fn name(&self) -> &str {
        "cowsay"
    }
    fn description(&self) -> &str {
        "A talking cow"
    }
    fn usage(&self) -> &str {
        "cowsay [text...]"
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let text = if args.is_empty() {
            env.stdin
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("Moo!")
                .to_string()
        } else {
            args.join(" ")
        };
        Ok(CommandOutput::Text(cowsay(&text)))
    }
}

fn cowsay(text: &str) -> String {
    let width = text.chars().count();
    format!(
        " {top}\n< {text} >\n {bottom}\n        \\   ^__^\n         \\  (oo)\\_______\n            (__)\\       )\\/\\\n                ||----w |\n                ||     ||",
        top = "_".repeat(width + 2),
        bottom = "-".repeat(width + 2),
    )
}

// ---------------------------------------------------------------------------
// fortune / joke
// ---------------------------------------------------------------------------

const FORTUNES: &[&str] = &[
    "You will find a bug in code you wrote yesterday.",
    "A clean build is the calm before the merge conflict.",
    "Today is a good day to write tests.",
    "The cache is always the problem, except when it is DNS.",
    "Your next commit will compile on the first try.",
    "Good things come to those who read the error message.",
];

const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are 10 kinds of people: those who understand binary and those who don't.",
    "A SQL query walks into a bar, walks up to two tables and asks: may I join you?",
    "I would tell you a UDP joke, but you might not get it.",
    "Why did the developer go broke? They used up all their cache.",
];

struct FortuneCmd;
impl Command for FortuneCmd {
    fn name(&self) -> &str {
        "fortune"
    }
    fn description(&self) -> &str {
        "Print a random fortune"
    }
    fn usage(&self) -> &str {
        "fortune"
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(pick(FORTUNES).to_string()))
    }
}

struct JokeCmd;
impl Command for JokeCmd {
    fn name(&self) -> &str {
        "joke"
    }
    fn description(&self) -> &str {
        "Tell a programming joke"
    }
    fn usage(&self) -> &str {
        "joke"
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(pick(JOKES).to_string()))
    }
}

/// Register fun commands.
pub fn register_fun_commands(reg: &mut crate::CommandRegistry) {
    for canned in CANNED {
        reg.register(Box::new(*canned));
    }
    reg.register(Box::new(SudoCmd));
    reg.register(Box::new(HackCmd));
    reg.register(Box::new(CowsayCmd));
    reg.register(Box::new(FortuneCmd));
    reg.register(Box::new(JokeCmd));
}
