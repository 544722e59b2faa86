use hashfile::{Config, Entry, HashFunction, Method};
use test_log::test;

#[test]
fn table_reopen_keeps_entries() -> hashfile::Result<()> {
    let folder = hashfile::get_tmp_folder();

    for method in Method::ALL {
        let path = folder.path().join(format!("{method}.bin"));
        let config = Config::new(&path)
            .capacity(50)
            .method(method)
            .hash_function(HashFunction::Fold);

        {
            let mut table = config.clone().open()?;
            for id in 0..200 {
                table.insert(&Entry::new(id, id * 31).name("x"))?;
            }
            table.remove(31)?;
            table.sync()?;
        }

        let mut table = config.open()?;
        assert!(!table.contains(31)?, "{method}");

        // Entries stored before reopening are found
        let found = (0..200)
            .filter_map(|id| table.search(id * 31).transpose())
            .collect::<hashfile::Result<Vec<_>>>()?;

        if method == Method::Direct {
            assert!(!found.is_empty());
        } else {
            assert_eq!(199, found.len(), "{method}");
        }

        // Appends continue after the existing zone
        if method != Method::Direct {
            let before = table.overflow_records()?;
            table.insert(&Entry::new(500, 31))?;
            assert!(table.contains(31)?, "{method}");
            assert!(table.overflow_records()? >= before);
        }
    }

    Ok(())
}

#[test]
fn table_reopen_truncate() -> hashfile::Result<()> {
    let folder = hashfile::get_tmp_folder();
    let path = folder.path().join("t.bin");

    {
        let mut table = Config::new(&path).method(Method::ChainHead).capacity(10).open()?;
        for id in 0..30 {
            table.insert(&Entry::new(id, id))?;
        }
    }

    let table = Config::new(&path)
        .method(Method::ChainHead)
        .capacity(10)
        .truncate(true)
        .open()?;

    assert_eq!(0, table.overflow_records()?);
    assert!(!table.contains(5)?);

    Ok(())
}

#[test]
fn table_reopen_capacity_mismatch() -> hashfile::Result<()> {
    let folder = hashfile::get_tmp_folder();
    let path = folder.path().join("t.bin");

    Config::new(&path).capacity(10).open()?;

    assert!(matches!(
        Config::new(&path).capacity(20).open(),
        Err(hashfile::Error::CapacityMismatch {
            stored: 10,
            configured: 20,
        })
    ));

    Ok(())
}

#[test]
fn table_reopen_method_mismatch() -> hashfile::Result<()> {
    let folder = hashfile::get_tmp_folder();
    let path = folder.path().join("t.bin");

    {
        let mut table = Config::new(&path)
            .capacity(10)
            .method(Method::ChainNoHead)
            .open()?;
        table.insert(&Entry::new(1, 1))?;
    }

    // 4 + 10 * 8 + 309 bytes is shorter than a slot array
    assert!(matches!(
        Config::new(&path).capacity(10).method(Method::ChainHead).open(),
        Err(hashfile::Error::InvalidLayout {
            method: Method::ChainHead,
            ..
        })
    ));

    {
        let mut table = Config::new(&path)
            .capacity(10)
            .method(Method::CollisionZone)
            .truncate(true)
            .open()?;
        table.insert(&Entry::new(1, 1))?;
        table.insert(&Entry::new(2, 11))?;
    }

    // Direct tables never have a zone
    assert!(matches!(
        Config::new(&path).capacity(10).method(Method::Direct).open(),
        Err(hashfile::Error::InvalidLayout {
            method: Method::Direct,
            ..
        })
    ));

    Ok(())
}
