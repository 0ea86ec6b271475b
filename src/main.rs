use gs1_element_parser::{escape_gs, parse_from_user_input};

fn main() {
    let input = "010460703218015421mq5pz7VGab9<GS>91FF2A<GS>93dGVz";
    match parse_from_user_input(input) {
        Ok(record) => {
            let rep = record.representations();
            println!("{record}");
            println!("{}", rep.ai_text);
            println!("{}", escape_gs(&rep.raw_with_gs));
        }
        Err(e) => eprintln!("failed to parse: {e}"),
    }
}
