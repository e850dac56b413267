/* Intercettazione dei comandi locali prima dell'invio:
    Empty -> testo vuoto, non si invia nulla
    Clear -> "/clear" (qualsiasi maiuscola, spazi ai bordi) va all'endpoint di pulizia
    Say   -> messaggio normale, già ripulito dagli spazi
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound<'a> {
    Empty,
    Clear,
    Say(&'a str),
}

impl<'a> Outbound<'a> {
    pub fn parse(input: &'a str) -> Self {
        let text = input.trim();
        if text.is_empty() {
            Outbound::Empty
        } else if text.eq_ignore_ascii_case("/clear") {
            Outbound::Clear
        } else {
            Outbound::Say(text)
        }
    }
}
