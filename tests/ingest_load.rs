use hashfile::{ingest::Rows, Config, Method};
use std::io::{BufReader, Write};
use test_log::test;

#[test]
fn ingest_load_into_table() -> Result<(), Box<dyn std::error::Error>> {
    let folder = hashfile::get_tmp_folder();
    let dataset = folder.path().join("people.csv");

    {
        let mut file = std::fs::File::create(&dataset)?;
        writeln!(file, "linha,endereco,id,nascimento,nome,email,celular")?;

        for line in 0..300 {
            writeln!(
                file,
                "{line},Rua {line},{},1990-01-01,Pessoa {line},p{line}@example.com,1199999{line:04}",
                58_000_000 + line * 10_000,
            )?;
        }
    }

    let rows = Rows::new(BufReader::new(std::fs::File::open(&dataset)?), 100..200);
    let entries = rows.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(100, entries.len());

    let mut table = Config::new(folder.path().join("people.bin"))
        .method(Method::ChainHead)
        .open()?;

    let mut collisions = 0;
    for entry in &entries {
        if table.insert(entry)?.collided() {
            collisions += 1;
        }
    }

    // Every id is a multiple of 10000, so all share bucket 0
    assert_eq!(99, collisions);

    let entry = table.search(58_000_000 + 150 * 10_000)?.expect("should exist");
    assert_eq!(150, entry.line);
    assert_eq!("Pessoa 150", entry.name.as_str());
    assert_eq!("p150@example.com", entry.email.as_str());

    assert!(table.search(58_000_000 + 50 * 10_000)?.is_none());

    Ok(())
}
