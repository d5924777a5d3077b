use serde::Serialize;

/// Accent colors understood by the platform renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Blue,
    Teal,
    Purple,
    Red,
}

impl Color {
    /// RGB value the substrate puts on the wire.
    pub fn rgb(self) -> u32 {
        match self {
            Self::Blue => 0x3498DB,
            Self::Teal => 0x1ABC9C,
            Self::Purple => 0x9B59B6,
            Self::Red => 0xE74C3C,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

#[derive(Default)]
pub struct EmbedBuilder {
    title: Option<String>,
    description: Option<String>,
    color: Option<Color>,
    fields: Vec<EmbedField>,
    footer: Option<String>,
}

impl EmbedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField { name: name.into(), value: value.into(), inline: false });
        self
    }

    pub fn inline_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField { name: name.into(), value: value.into(), inline: true });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn build(self) -> Embed {
        Embed {
            title: self.title,
            description: self.description,
            color: self.color,
            fields: self.fields,
            footer: self.footer,
        }
    }
}

/// Where a reply is delivered: only to the invoking user, or into the
/// channel/thread it was invoked from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Channel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub embed: Embed,
    pub visibility: Visibility,
}

impl Reply {
    pub fn private(embed: Embed) -> Self {
        Self { embed, visibility: Visibility::Private }
    }

    pub fn channel(embed: Embed) -> Self {
        Self { embed, visibility: Visibility::Channel }
    }
}

fn plain_message(text: impl Into<String>) -> Embed {
    EmbedBuilder::new().description(text).build()
}

pub fn help_message(trade_channel: &str, audit_channel: &str) -> Embed {
    EmbedBuilder::new()
        .title("Bot Commands")
        .description("List of available commands:")
        .color(Color::Blue)
        .field("/help", "Shows this help message")
        .field(
            "/trade",
            format!(
                "Opens a new trade thread under the #{trade_channel} channel; \
                 may only be run in the #{trade_channel} channel"
            ),
        )
        .field(
            "/close",
            "Closes/ends an open trade request; may only be run in the trade thread \
             by the trade requestor",
        )
        .field(
            "/reload",
            format!(
                "Force a reload of the item roster; administrators only, \
                 in the #{audit_channel} channel"
            ),
        )
        .build()
}

pub fn wrong_channel_message(channel: &str) -> Embed {
    plain_message(format!("This command can only be used in the '{channel}' channel."))
}

pub fn thread_only_message() -> Embed {
    plain_message("This command must be used in a trade thread")
}

pub fn not_permitted_message(display_name: &str) -> Embed {
    EmbedBuilder::new()
        .title("Not Permitted")
        .description(format!("{display_name} does not have permission to close this thread."))
        .build()
}

pub fn no_run_permission_message(display_name: &str) -> Embed {
    plain_message(format!("{display_name}, you do not have permission to run this command."))
}

pub fn trade_summary_message(
    requestor_mention: &str,
    item: &str,
    features: &str,
    requestor_id: &str,
) -> Embed {
    let features = if features.is_empty() { "None" } else { features };
    EmbedBuilder::new()
        .title("Trade Request Started")
        .color(Color::Teal)
        .field("Initiated By:", requestor_mention)
        .inline_field("Request", item)
        .inline_field("Features", features)
        .footer(format!("Ref: {requestor_id}"))
        .build()
}

pub fn post_prompt_message(thread_mention: &str) -> Embed {
    EmbedBuilder::new()
        .title("Please Post Message In Thread")
        .color(Color::Red)
        .field(
            "Is your request visible?",
            format!("Post a message in the {thread_mention} thread to be sure to be seen!"),
        )
        .build()
}

pub fn close_notice_message(display_name: &str) -> Embed {
    EmbedBuilder::new()
        .title("Close Trade Request")
        .description(format!("{display_name} has requested closure of this trade request"))
        .color(Color::Red)
        .build()
}

pub fn create_forbidden_message() -> Embed {
    plain_message("Error: Bot doesn't have permission to create threads")
}

pub fn delete_forbidden_message() -> Embed {
    plain_message("Error: Bot doesn't have permission to delete threads")
}

pub fn thread_create_failed_message(detail: &str) -> Embed {
    plain_message(format!("Error creating thread: {detail}"))
}

pub fn thread_close_failed_message(detail: &str) -> Embed {
    plain_message(format!("Error deleting thread: {detail}"))
}

pub fn roster_loaded_message(count: usize) -> Embed {
    plain_message(format!("Loaded {count} entries"))
}

pub fn roster_reload_failed_message(detail: &str) -> Embed {
    plain_message(format!("Error loading item roster: {detail}"))
}

pub fn unknown_command_message(name: &str) -> Embed {
    plain_message(format!("Unsupported command `/{name}`. Try `/help`."))
}

pub fn missing_item_message() -> Embed {
    plain_message("A trade request needs an item name: `/trade <item> [features]`.")
}
