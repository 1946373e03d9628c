use crate::entity::NewsEventModel;

const NO_ISIN: &str = "-";

pub struct EventMessageBuilder<'a> {
    event: &'a NewsEventModel,
}

impl<'a> EventMessageBuilder<'a> {
    pub fn new(event: &'a NewsEventModel) -> Self {
        Self { event }
    }

    pub fn build(&self) -> String {
        let e = self.event;

        let mut lines = vec![
            format!(
                "[{}] {} {}",
                e.isin.as_deref().unwrap_or(NO_ISIN),
                e.published_date,
                e.event_type
            ),
            e.title.clone(),
        ];
        if let Some(amount) = &e.payment_amount {
            lines.push(format!("Payment: {amount}"));
        }
        lines.push(e.news_url.clone());

        lines.join("\n")
    }
}
