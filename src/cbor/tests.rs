
use super::*;
use crate::tests::serialize_and_compare;
use serde::Serialize;

/*
Expected values are hex tokens followed by an annotation. The annotation
must not start with a token that is valid hex, hence the `//`.
```
    1b 0000000040000001 // wide head
```
*/

fn expect_err<T: Serialize + ?Sized>(value: &T, err: Error) {
    assert_eq!(to_vec(value), Err(err));
}
