/// Render the direct message sent to a manager about an unacknowledged escalation.
///
/// `ack_emoji` is the reaction responders are asked to add (without colons).
pub fn unacknowledged_alert(permalink: &str, ack_emoji: &str) -> String {
    format!(
        ":warning: *Unacknowledged Escalation Alert* :warning:\n\
         A business escalation has not yet been acknowledged by Tier 3 or the relevant leads. \
         Please review this ticket and assign an appropriate Tier 3 or lead to address it. \
         Additionally, kindly ask the individual to acknowledge this Slack message by reacting \
         with the :{ack_emoji}: icon to confirm their action\n\n\
         *View full escalation:*\n\
         {permalink}"
    )
}
