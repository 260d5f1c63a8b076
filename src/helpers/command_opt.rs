use serenity::model::interactions::application_command::ApplicationCommandInteractionDataOption;

pub fn find_string_opt(options: &[ApplicationCommandInteractionDataOption], name: &str) -> Option<String> {
    options.iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|v| v.as_str())
        .map(|v| v.to_owned())
}
