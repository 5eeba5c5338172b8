// Server event logging: gateway events in, embeds to the log channel out.

pub mod events;
pub mod formatter;
