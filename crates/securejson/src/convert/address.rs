//! Binary layout for address lists.
//!
//! Each address is one length byte (4 or 16) followed by its octets. The
//! whole list is sealed as a single payload, so the number of devices is
//! hidden only up to the ciphertext length. An empty list is an empty payload.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const V4_LEN: u8 = 4;
const V6_LEN: u8 = 16;

pub(crate) fn encode(addresses: &[IpAddr], out: &mut Vec<u8>) {
    for addr in addresses {
        match addr {
            IpAddr::V4(v4) => {
                out.push(V4_LEN);
                out.extend_from_slice(&v4.octets());
            }
            IpAddr::V6(v6) => {
                out.push(V6_LEN);
                out.extend_from_slice(&v6.octets());
            }
        }
    }
}

pub(crate) fn decode(mut bytes: &[u8]) -> Result<Vec<IpAddr>, &'static str> {
    let mut addresses = Vec::new();
    while let Some((&len, rest)) = bytes.split_first() {
        let len = usize::from(len);
        if rest.len() < len {
            return Err("address list is truncated");
        }
        let (octets, tail) = rest.split_at(len);
        let addr = match len {
            4 => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(octets);
                IpAddr::V4(Ipv4Addr::from(buf))
            }
            16 => {
                let mut buf = [0u8; 16];
                buf.copy_from_slice(octets);
                IpAddr::V6(Ipv6Addr::from(buf))
            }
            _ => return Err("address has an invalid length prefix"),
        };
        addresses.push(addr);
        bytes = tail;
    }
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_families_round_trip() {
        let list: Vec<IpAddr> = vec![
            "192.168.1.1".parse().unwrap(),
            "::1".parse().unwrap(),
            "127.0.0.1".parse().unwrap(),
            "fe80::1ff:fe23:4567:890a".parse().unwrap(),
        ];
        let mut buf = Vec::new();
        encode(&list, &mut buf);
        assert_eq!(buf.len(), 4 + (4 + 16 + 4 + 16));
        assert_eq!(decode(&buf).unwrap(), list);
    }

    #[test]
    fn empty_list_is_empty_payload() {
        let mut buf = Vec::new();
        encode(&[], &mut buf);
        assert!(buf.is_empty());
        assert!(decode(&buf).unwrap().is_empty());
    }

    #[test]
    fn bad_length_prefix_rejected() {
        assert!(decode(&[5, 1, 2, 3, 4, 5]).is_err());
        assert!(decode(&[0]).is_err());
    }

    #[test]
    fn truncated_address_rejected() {
        assert!(decode(&[4, 127, 0, 0]).is_err());
        assert!(decode(&[4, 127, 0, 0, 1, 16, 0]).is_err());
    }
}
