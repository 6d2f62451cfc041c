use crate::types::Presentation;
use serenity::builder::CreateEmbed;
use std::fmt::Write as _;

/// Something that can be shown inside of a discord embed
pub trait Embedable {
    fn append_to<'a>(&self, embed: &'a mut CreateEmbed) -> &'a mut CreateEmbed;
}

impl Embedable for Presentation {
    fn append_to<'a>(&self, embed: &'a mut CreateEmbed) -> &'a mut CreateEmbed {
        embed.description(&self.text);

        if let Some(image) = &self.image {
            embed.thumbnail(image);
        }

        // discord has no buttons here, the choices become commands
        if !self.choices.is_empty() {
            let mut choices = String::new();

            for choice in &self.choices {
                writeln!(&mut choices, "`!{}` {}", choice.action_id, choice.label).ok();
            }

            embed.field("Choices", choices, false);
        }

        embed
    }
}
